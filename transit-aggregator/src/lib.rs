//! Transit arrivals aggregator.
//!
//! Pulls live rail arrivals, bus predictions and bike-share availability
//! from three independent feeds, filters them by the rider's preferences,
//! and folds them into one result with a success flag per source.

pub mod aggregate;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod connectivity;
pub mod connector;
pub mod decode;
pub mod domain;
pub mod filter;
pub mod merge;
pub mod web;
