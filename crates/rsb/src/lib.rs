//! Command line front end for [`rsb_bundle`].

pub mod commands;
