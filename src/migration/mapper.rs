use crate::types::{LegacyRegistrant, RegistrantInput};

/// Values the old portal treated as "unset": empty strings, `false`, zero.
trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl<T> Truthy for Vec<T> {
    fn is_truthy(&self) -> bool {
        true
    }
}

fn truthy<T: Truthy + Clone>(value: &Option<T>) -> Option<T> {
    value.as_ref().filter(|v| v.is_truthy()).cloned()
}

/// Build the new-API create input for a legacy registrant.
///
/// The id is carried over verbatim and the event reference always points at
/// `event_id`. Every optional field that is missing or falsy becomes `null`;
/// nothing else is validated or converted.
pub fn map_registrant(legacy: &LegacyRegistrant, event_id: &str) -> RegistrantInput {
    RegistrantInput {
        id: Some(legacy.id.clone()),
        aps_id: event_id.to_string(),
        first_name: truthy(&legacy.first_name),
        last_name: truthy(&legacy.last_name),
        email: legacy.email.clone(),
        phone: truthy(&legacy.phone),
        company_id: truthy(&legacy.company_id),
        job_title: truthy(&legacy.job_title),
        attendee_type: truthy(&legacy.attendee_type),
        status: truthy(&legacy.status),
        terms_accepted: truthy(&legacy.terms_accepted),
        interests: truthy(&legacy.interests),
        other_interest: truthy(&legacy.other_interest),
        speed_networking: truthy(&legacy.speed_networking),
        speed_networking_status: truthy(&legacy.speed_networking_status),
        billing_address_first_name: truthy(&legacy.billing_address_first_name),
        billing_address_last_name: truthy(&legacy.billing_address_last_name),
        billing_address_email: truthy(&legacy.billing_address_email),
        billing_address_phone: truthy(&legacy.billing_address_phone),
        billing_address_street: truthy(&legacy.billing_address_street),
        billing_address_city: truthy(&legacy.billing_address_city),
        billing_address_state: truthy(&legacy.billing_address_state),
        billing_address_zip: truthy(&legacy.billing_address_zip),
        same_as_attendee: truthy(&legacy.same_as_attendee),
        speaker_topic: truthy(&legacy.speaker_topic),
        learning_objectives: truthy(&legacy.learning_objectives),
        total_amount: truthy(&legacy.total_amount),
        discount_code: truthy(&legacy.discount_code),
        morrisette_transportation: truthy(&legacy.morrisette_transportation),
        morrisette_status: truthy(&legacy.morrisette_status),
        aristo_transportation: truthy(&legacy.aristo_transportation),
        aristo_status: truthy(&legacy.aristo_status),
        magna_transportation: truthy(&legacy.magna_transportation),
        magna_status: truthy(&legacy.magna_status),
        payment_confirmation: truthy(&legacy.payment_confirmation),
        registration_email_sent: truthy(&legacy.registration_email_sent),
        registration_email_sent_date: truthy(&legacy.registration_email_sent_date),
        registration_email_received: truthy(&legacy.registration_email_received),
        registration_email_received_date: truthy(&legacy.registration_email_received_date),
        welcome_email_sent: truthy(&legacy.welcome_email_sent),
        welcome_email_sent_date: truthy(&legacy.welcome_email_sent_date),
        welcome_email_received: truthy(&legacy.welcome_email_received),
        welcome_email_received_date: truthy(&legacy.welcome_email_received_date),
        payment_method: truthy(&legacy.payment_method),
        payment_last4: truthy(&legacy.payment_last4),
        approved_at: truthy(&legacy.approved_at),
        headshot: truthy(&legacy.headshot),
        presentation: truthy(&legacy.presentation),
        presentation_title: truthy(&legacy.presentation_title),
        presentation_summary: truthy(&legacy.presentation_summary),
        bio: truthy(&legacy.bio),
    }
}
