//! Staff back office: session gate, login form and the management dashboard

mod dashboard;
mod gate;
mod login;

pub use dashboard::*;
pub use gate::*;
pub use login::*;
