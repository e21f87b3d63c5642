//! PeopleOps Core - Multi-tenant HR management backend
//!
//! Provides tenant signup and lifecycle management, per-tenant
//! role-permission matrices, employee/attendance/leave management,
//! billing webhook ingestion, and platform administration.

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod migration;
pub mod policy;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;
pub mod workers;
