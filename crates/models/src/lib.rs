pub mod errors;
pub mod validate;
pub mod db;
pub mod user;
pub mod user_profile;
pub mod user_credentials;
pub mod catalog;
pub mod appointment;
pub mod support_ticket;
pub mod support_message;

#[cfg(test)]
mod tests;
