pub mod member_traffic;
