//! Contact page: the booking form and the contact form behind one mode
//! switch. Each form keeps its own fields and status; switching modes only
//! changes which one is shown.

use std::sync::Arc;

use serde::Serialize;

use crate::config::ClinicTimeZone;
use crate::gateway::ClinicGateway;
use crate::submission::{AppointmentForm, LeadForm, SubmissionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    #[default]
    Appointment,
    Contact,
}

pub struct ContactPage<G> {
    mode: FormMode,
    appointment: AppointmentForm<G>,
    lead: LeadForm<G>,
}

impl<G: ClinicGateway> ContactPage<G> {
    /// Both forms share one gateway; nothing else is shared.
    pub fn new(gateway: Arc<G>, zone: ClinicTimeZone) -> Self {
        Self {
            mode: FormMode::default(),
            appointment: AppointmentForm::new(gateway.clone(), zone),
            lead: LeadForm::new(gateway),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn switch_mode(&mut self, mode: FormMode) {
        if self.mode != mode {
            tracing::debug!(?mode, "Contact page mode switched");
        }
        self.mode = mode;
    }

    pub fn appointment(&self) -> &AppointmentForm<G> {
        &self.appointment
    }

    pub fn appointment_mut(&mut self) -> &mut AppointmentForm<G> {
        &mut self.appointment
    }

    pub fn lead(&self) -> &LeadForm<G> {
        &self.lead
    }

    pub fn lead_mut(&mut self) -> &mut LeadForm<G> {
        &mut self.lead
    }

    /// Status of the form currently on screen.
    pub fn active_status(&self) -> &SubmissionStatus {
        match self.mode {
            FormMode::Appointment => self.appointment.status(),
            FormMode::Contact => self.lead.status(),
        }
    }

    /// Whether the form currently on screen accepts a submit.
    pub fn can_submit_active(&self) -> bool {
        match self.mode {
            FormMode::Appointment => self.appointment.can_submit(),
            FormMode::Contact => self.lead.can_submit(),
        }
    }
}
