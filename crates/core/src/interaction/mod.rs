pub mod click_event;
pub mod hit_test;
pub mod view_transform;
