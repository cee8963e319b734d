pub mod check_rpc;
pub mod run;
pub mod validate;
