//! Response Domain
//!
//! Everything that comes back from an operator after a batch goes out:
//!
//! - [`protocol`]: receipt acknowledgments with the operator protocol number
//! - [`statement`]: return statements with per-guide outcomes and denials
//! - [`payment`]: payment statements with settled values and bank details
//! - [`denial`]: denial-code interpretation and resolution guidance
//!
//! Parsers are tolerant by design: element names vary across operators, so
//! each field is resolved against a list of known spellings and absent data
//! is `None`, judged afterwards by `validate()`.

pub mod denial;
pub mod error;
pub mod payment;
pub mod protocol;
pub mod statement;

pub use denial::{
    DenialAction, DenialCategory, DenialInterpreter, DenialSummary, Interpretation, Severity,
};
pub use error::ParseError;
pub use payment::{BankAccount, PaymentParser, PaymentStatement, SettledStatement};
pub use protocol::{ProtocolParser, ProtocolReceipt, ReceiptError};
pub use statement::{DenialRecord, ReturnStatement, StatementGuide, StatementParser};
