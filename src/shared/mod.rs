pub mod constants;
pub mod media;
pub mod types;

#[cfg(test)]
pub mod test_helpers;
