pub mod info;
pub mod personas;
pub mod run;
