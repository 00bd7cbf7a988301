//! Interactive input form for recording a new investment.
//!
//! [`FormState`] collects raw text one event at a time; [`parse_form_data`]
//! turns the submitted text into a [`NewInvestment`](crate::NewInvestment).

mod parser;
mod state;

pub use parser::{ValidationError, parse_form_data};
pub use state::{
    APPLICATION_DATE, BANK, FieldValues, FormEvent, FormOutcome, FormState, InputField,
    REDEMPTION_DATE, TITLE, VALUE,
};
