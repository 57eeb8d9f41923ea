pub use campusgate_model::*;
