use super::transaction::Status;

pub const APPROVED_MESSAGE: &str =
  "Thank you for confirming. Your transaction has been approved and no further action is needed.";
pub const CANCELLED_MESSAGE: &str =
  "Thank you. Your transaction has been cancelled and marked as fraud. We will contact you shortly.";
pub const UNEXPECTED_CONTACT_MESSAGE: &str =
  "We could not find a transaction awaiting your confirmation. No changes have been made.";
pub const CLARIFICATION_MESSAGE: &str =
  "Sorry, we did not understand your reply. Please answer YES if you made the transaction or NO if you did not.";

/// An inbound text message.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingReply {
  pub phone: String,
  pub body: String,
}

impl IncomingReply {
  pub fn new(phone: impl Into<String>, body: impl Into<String>) -> Self {
    Self {
      phone: phone.into(),
      body: body.into(),
    }
  }

  pub fn intent(&self) -> ReplyIntent {
    ReplyIntent::parse(&self.body)
  }
}

/// What the customer meant with a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyIntent {
  /// "YES": the customer made the transaction.
  Confirmed,
  /// "NO": the customer did not make the transaction.
  Denied,
  Unrecognized,
}

impl ReplyIntent {
  pub fn parse(body: &str) -> Self {
    let normalized = body.trim();
    if normalized.eq_ignore_ascii_case("YES") {
      ReplyIntent::Confirmed
    } else if normalized.eq_ignore_ascii_case("NO") {
      ReplyIntent::Denied
    } else {
      ReplyIntent::Unrecognized
    }
  }

  /// The status that pending-fraud transactions move to after this reply.
  pub fn target_status(&self) -> Option<Status> {
    match self {
      ReplyIntent::Confirmed => Some(Status::Approved),
      ReplyIntent::Denied => Some(Status::Fraud),
      ReplyIntent::Unrecognized => None,
    }
  }

  /// The confirmation sent back after at least one transaction was transitioned.
  pub fn confirmation(&self) -> &'static str {
    match self {
      ReplyIntent::Confirmed => APPROVED_MESSAGE,
      ReplyIntent::Denied => CANCELLED_MESSAGE,
      ReplyIntent::Unrecognized => CLARIFICATION_MESSAGE,
    }
  }
}

#[cfg(test)]
mod tests {

  use super::*;

  #[test]
  fn parse_intents() {
    let cases = vec![
      ("YES", ReplyIntent::Confirmed),
      ("yes", ReplyIntent::Confirmed),
      ("  Yes \n", ReplyIntent::Confirmed),
      ("NO", ReplyIntent::Denied),
      ("\tno ", ReplyIntent::Denied),
      ("nO", ReplyIntent::Denied),
      ("maybe", ReplyIntent::Unrecognized),
      ("yes please", ReplyIntent::Unrecognized),
      ("", ReplyIntent::Unrecognized),
    ];

    for (body, expected) in cases {
      assert_eq!(IncomingReply::new("+15555550100", body).intent(), expected, "{:?}", body);
    }
  }

  #[test]
  fn target_status_and_confirmation() {
    assert_eq!(ReplyIntent::Confirmed.target_status(), Some(Status::Approved));
    assert_eq!(ReplyIntent::Denied.target_status(), Some(Status::Fraud));
    assert_eq!(ReplyIntent::Unrecognized.target_status(), None);

    assert_eq!(ReplyIntent::Confirmed.confirmation(), APPROVED_MESSAGE);
    assert_eq!(ReplyIntent::Denied.confirmation(), CANCELLED_MESSAGE);
  }
}
