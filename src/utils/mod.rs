pub mod grip_error;
