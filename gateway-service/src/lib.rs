//! Gateway service: relays text, image, document, and audio prompts to the
//! Gemini API and returns the extracted response text.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod services;
pub mod startup;
