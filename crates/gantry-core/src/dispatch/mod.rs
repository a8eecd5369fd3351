//! Dispatch: payload construction (`payload`) and executor invocation with
//! outcome classification (`dispatcher`).

pub mod dispatcher;
pub mod payload;
