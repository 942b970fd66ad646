use serde::Deserialize;

use crate::screening::IncomingReply;

/// An inbound text message, either as published by the SMS channel (`originationNumber`, `messageBody`)
/// or as posted by a Twilio webhook (`From`, `Body`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundSms {
  #[serde(alias = "From")]
  pub origination_number: String,

  #[serde(alias = "To", default)]
  pub destination_number: String,

  #[serde(alias = "Body", default)]
  pub message_body: String,

  #[serde(alias = "MessageSid", default)]
  pub inbound_message_id: String,
}

impl From<InboundSms> for IncomingReply {
  fn from(sms: InboundSms) -> Self {
    IncomingReply::new(sms.origination_number, sms.message_body)
  }
}

/// A notification envelope whose `Message` carries the serialized inbound text.
#[derive(Debug, Deserialize)]
pub struct NotificationEnvelope {
  #[serde(rename = "Type")]
  pub kind: String,

  #[serde(rename = "Message")]
  pub message: String,
}

/// Parses a message body that holds either the raw inbound text or a notification envelope around it.
pub fn parse_inbound_sms(body: &str) -> serde_json::Result<InboundSms> {
  match serde_json::from_str::<NotificationEnvelope>(body) {
    Ok(envelope) => serde_json::from_str(&envelope.message),
    Err(_) => serde_json::from_str(body),
  }
}
