pub mod collapse;
pub mod configure;
pub mod deploy;
pub mod inventory;
