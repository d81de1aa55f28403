pub(crate) mod account;
pub(crate) mod dashboard;
pub(crate) mod login;
pub(crate) mod reports;
