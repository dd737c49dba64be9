pub mod ok_system;
