pub mod extraction;
pub mod lab_values;
