//! Point-of-sale register: a cart engine for the cashier's session and a
//! sale recorder API that persists completed sales and reports daily totals.

pub mod cart;
pub mod client;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod models;
pub mod register;
pub mod routes;
pub mod services;
pub mod state;
