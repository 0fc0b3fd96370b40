pub mod body_properties;
pub mod bounding_box_helpers;
pub mod collidables;
pub mod collision_detection;
