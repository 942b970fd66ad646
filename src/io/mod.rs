//! This module contains everything that crosses the boundary with the messaging layer
//!
//! The [`event`] module holds the shapes of the upstream batches (change-stream and queue events)
//! and of the partial batch failure response. The [`decoder`] turns each raw record into a
//! [`DeliveryRecord`] tied to its delivery identifier, whether or not it could be decoded.
//!
//! The [`transaction`], [`image`] and [`reply`] modules contain structs needed to deserialize data.
//! They are intentionally duplicated from the domain model to decouple the IO details from the domain logic and allow their evolution independently.
//!

mod decoder;
mod event;
mod image;
mod reply;
mod transaction;

pub use decoder::{
  decode_reply_message, decode_stream_record, decode_transaction_message, DecodeError, DeliveryId,
  DeliveryRecord,
};
pub use event::{BatchItemFailure, BatchResponse, QueueEvent, StreamEvent};
