//! WhatsApp deep links prefilled with a repair request.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::entities::Coordinates;

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Who is asking for a repair and what for.
#[derive(Clone, Debug, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub repair_type: String,
    #[serde(default)]
    pub additional_details: Option<String>,
}

impl ContactDetails {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.repair_type.trim().is_empty()
    }

    fn details(&self) -> Option<&str> {
        self.additional_details
            .as_deref()
            .map(str::trim)
            .filter(|details| !details.is_empty())
    }
}

pub fn whatsapp_url(whatsapp_number: &str, message: &str) -> String {
    let number: String = whatsapp_number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    format!(
        "https://wa.me/{}?text={}",
        number,
        utf8_percent_encode(message, URI_COMPONENT)
    )
}

pub fn emergency_message(contact: &ContactDetails, location: Coordinates) -> String {
    let mut message = String::from("*PERMINTAAN DARURAT PERBAIKAN*\n\n");
    message += &format!("Nama: {}\n", contact.name);
    message += &format!("No. HP: {}\n", contact.phone);
    message += &format!("Jenis Perbaikan: {}\n", contact.repair_type);

    if let Some(details) = contact.details() {
        message += &format!("Detail Tambahan: {}\n", details);
    }

    message += &format!("\nLokasi Saya:\n{}", location.maps_url());
    message
}

pub fn order_message(contact: &ContactDetails, location: Coordinates) -> String {
    let mut message = String::from("Halo, saya ingin memesan jasa perbaikan.\n\n");
    message += &format!("Nama: {}\n", contact.name);
    message += &format!("No. HP: {}\n", contact.phone);
    message += &format!("Jenis Perbaikan: {}\n", contact.repair_type);

    if let Some(details) = contact.details() {
        message += &format!("Detail: {}\n", details);
    }

    message += &format!("\nLokasi Saya:\n{}", location.maps_url());
    message
}
