pub mod decimal;
pub mod normalize;
