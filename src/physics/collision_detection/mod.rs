pub mod collision_tasks;
