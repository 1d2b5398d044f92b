pub mod building;
pub mod lead;
pub mod operator;
pub mod room;
pub mod tenant;
