use std::fmt;

use super::{DelegatorAddress, Frequency, SubscriberEmail};

/// A subscriber's digest for one delegator at one frequency.
///
/// The triple is the unique key of the recurring job, and the delegator and
/// frequency together name the contact list the subscriber belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub email: SubscriberEmail,
    pub frequency: Frequency,
    pub delegator_address: DelegatorAddress,
}

impl Subscription {
    pub fn parse(email: &str, frequency: &str, delegator_address: &str) -> Result<Self, String> {
        Ok(Subscription {
            email: SubscriberEmail::parse(email.to_string())?,
            frequency: frequency.parse()?,
            delegator_address: DelegatorAddress::parse(delegator_address.to_string())?,
        })
    }

    pub fn list_name(&self) -> ListName {
        ListName(format!("{} - {}", self.delegator_address, self.frequency))
    }
}

/// Name of a contact list: `{delegatorAddress} - {frequency}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListName(String);

impl ListName {
    /// Lists are matched on their exact name, case included.
    pub fn matches(&self, name: &str) -> bool {
        self.0 == name
    }
}

impl AsRef<str> for ListName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
