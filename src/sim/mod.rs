pub mod controller;
pub mod event;
pub mod scheduler;
pub mod session;
pub mod turn;
