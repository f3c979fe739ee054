//! Value types operated on by the engine

pub mod matrix;
pub mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
