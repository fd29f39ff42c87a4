pub mod margin;
pub mod theme;
