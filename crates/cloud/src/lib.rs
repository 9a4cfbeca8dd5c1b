//! External service gateways: object storage and SMS delivery.

pub mod sms;
pub mod storage;

pub use sms::{MockSms, SmsOutcome, SmsSender, SmsStatus, TwilioSms};
pub use storage::{LocalStorage, ObjectStorage, S3Storage, StorageError, StorageRouter};
