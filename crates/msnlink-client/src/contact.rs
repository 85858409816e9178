//! Contact and group snapshots.
//!
//! Contacts are owned by the address-book collaborator. The client only sees
//! cloned snapshots carried by signals and never mutates them.

use std::{collections::BTreeMap, fmt};

/// Contact identity (the account address).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactId(String);

impl ContactId {
    /// Create a contact identity from an account address.
    pub fn new(account: impl Into<String>) -> Self {
        Self(account.into())
    }

    /// Account address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContactId {
    fn from(account: &str) -> Self {
        Self::new(account)
    }
}

/// Presence status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Presence {
    /// Available.
    Online,
    /// Busy.
    Busy,
    /// Idle.
    Idle,
    /// Be right back.
    BeRightBack,
    /// Away.
    Away,
    /// On the phone.
    OnThePhone,
    /// Out to lunch.
    OutToLunch,
    /// Appears offline to others.
    Invisible,
    /// Not signed in.
    #[default]
    Offline,
}

/// Opaque reference to a contact's shared binary asset (display picture,
/// emoticon). Resolved by a separate object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataObjectRef(pub String);

/// Capability flags advertised by the contact's client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClientCapabilities(pub u32);

/// Membership attributes of a contact in the address book.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactAttributes {
    /// Contact is on the messenger list. Only these are subscribed when the
    /// client opens.
    pub im_contact: bool,
}

/// Mutable contact properties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactProperties {
    /// Current presence.
    pub presence: Presence,
    /// Display name.
    pub display_name: String,
    /// Personal status message.
    pub personal_message: String,
    /// Currently playing media. `None` if nothing is advertised.
    pub current_media: Option<String>,
    /// Display picture reference. `None` if unset.
    pub msn_object: Option<DataObjectRef>,
    /// Client capability flags.
    pub client_capabilities: ClientCapabilities,
}

/// Snapshot of a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Contact identity.
    pub id: ContactId,
    /// Address-book attributes.
    pub attributes: ContactAttributes,
    /// Current properties.
    pub properties: ContactProperties,
}

impl Contact {
    /// Create a contact with default properties.
    pub fn new(id: impl Into<ContactId>) -> Self {
        Self {
            id: id.into(),
            attributes: ContactAttributes::default(),
            properties: ContactProperties::default(),
        }
    }

    /// Mark the contact as a messenger contact.
    #[must_use]
    pub fn im_contact(mut self) -> Self {
        self.attributes.im_contact = true;
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.properties.display_name = name.into();
        self
    }
}

/// Address-book group identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupId(pub String);

/// Address-book group snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Group identity.
    pub id: GroupId,
    /// Group display name.
    pub name: String,
}

/// Observable contact property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactProperty {
    /// `presence`
    Presence,
    /// `display-name`
    DisplayName,
    /// `personal-message`
    PersonalMessage,
    /// `current-media`
    CurrentMedia,
    /// `msn-object`
    MsnObject,
    /// `client-capabilities`
    ClientCapabilities,
}

impl ContactProperty {
    /// Every property the client republishes.
    pub const ALL: [Self; 6] = [
        Self::Presence,
        Self::DisplayName,
        Self::PersonalMessage,
        Self::CurrentMedia,
        Self::MsnObject,
        Self::ClientCapabilities,
    ];

    /// Property name as emitted by the contact.
    pub fn signal_name(self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::DisplayName => "display-name",
            Self::PersonalMessage => "personal-message",
            Self::CurrentMedia => "current-media",
            Self::MsnObject => "msn-object",
            Self::ClientCapabilities => "client-capabilities",
        }
    }
}

/// Named event emitted by a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactEvent {
    /// `infos-changed`: extended profile information was updated.
    InfosChanged {
        /// Updated profile fields.
        infos: BTreeMap<String, String>,
    },
}

impl ContactEvent {
    /// Event name as emitted by the contact.
    pub fn signal_name(&self) -> &'static str {
        match self {
            Self::InfosChanged { .. } => "infos-changed",
        }
    }
}
