pub mod brush;
pub mod fill;
pub mod gradient;
pub mod shapes;
pub mod text;
