use crate::domain::money::Rupees;
use crate::domain::payment::{
    CheckoutRequest, GatewayErrorKind, OrderNotes, OrderRequest, PartialSplit, PaymentOption,
    PaymentRecord, PaymentType, VerifyPaymentRequest, checkout_description,
};
use crate::domain::ports::{PaymentGatewayBox, VisitBackendBox};
use crate::domain::pricing::{self, DiscountField};
use crate::domain::visit::{
    CreateVisitRequest, DraftVisit, SubscriptionDetails, VisitPurposeDetails,
};
use crate::error::{BookingError, Result};
use chrono::Utc;
use tracing::{info, warn};

const VISIT_SAVED: &str = "Visit saved successfully";
const PAID_AND_SAVED: &str = "Payment successful and visit saved!";

/// Where a booking is in its submit / pay / save lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingState {
    Idle,
    AwaitingPaymentChoice,
    AwaitingPartialAmounts,
    Verifying,
    Persisting,
    Saved,
    /// Saving failed; the draft is kept so the form can be submitted again.
    Failed(String),
}

/// What the caller has to do after a step of the flow.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved { message: String },
    PaymentChoiceRequired { total: Rupees },
    PartialAmountsRequired { total: Rupees, suggested: PartialSplit },
}

/// One grooming booking form and the payment flow behind it.
///
/// The backend and the gateway are injected, so the session holds no global
/// state. All remote calls are awaited one after another and a failure ends
/// the attempt without retrying.
pub struct BookingSession {
    backend: VisitBackendBox,
    gateway: PaymentGatewayBox,
    pet_id: String,
    purpose: VisitPurposeDetails,
    discount: DiscountField,
    subscription_availed: bool,
    plan_id: Option<String>,
    subscription: Option<SubscriptionDetails>,
    subscription_key: Option<(String, String)>,
    draft: Option<DraftVisit>,
    saved: Option<CreateVisitRequest>,
    state: BookingState,
}

impl BookingSession {
    pub fn new(
        pet_id: impl Into<String>,
        purpose: VisitPurposeDetails,
        backend: VisitBackendBox,
        gateway: PaymentGatewayBox,
    ) -> Self {
        let discount = DiscountField::new(purpose.price);
        Self {
            backend,
            gateway,
            pet_id: pet_id.into(),
            purpose,
            discount,
            subscription_availed: false,
            plan_id: None,
            subscription: None,
            subscription_key: None,
            draft: None,
            saved: None,
            state: BookingState::Idle,
        }
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn draft(&self) -> Option<&DraftVisit> {
        self.draft.as_ref()
    }

    pub fn saved_visit(&self) -> Option<&CreateVisitRequest> {
        self.saved.as_ref()
    }

    pub fn subscription(&self) -> Option<&SubscriptionDetails> {
        self.subscription.as_ref()
    }

    pub fn discount(&self) -> Rupees {
        self.discount.value()
    }

    pub fn is_subscription_availed(&self) -> bool {
        self.subscription_availed
    }

    pub fn final_price(&self) -> Rupees {
        pricing::final_price(
            self.purpose.price,
            self.discount.value(),
            self.subscription_availed,
        )
    }

    pub fn savings(&self) -> Option<Rupees> {
        pricing::savings(self.purpose.price, self.final_price())
    }

    fn validate_ids(&self) -> Result<()> {
        if self.pet_id.trim().is_empty() {
            return Err(BookingError::Validation(
                "A pet must be selected. Please select a pet before proceeding.".to_string(),
            ));
        }
        if self.purpose.id.trim().is_empty() {
            return Err(BookingError::Validation(
                "Visit type is missing. Please try again.".to_string(),
            ));
        }
        Ok(())
    }

    /// Fetches the pet's subscription for this visit type.
    ///
    /// The backend is asked once per (pet, visit type) pair; later calls
    /// return the cached answer.
    pub async fn load_subscription(&mut self) -> Result<Option<&SubscriptionDetails>> {
        self.validate_ids()?;
        let key = (
            self.pet_id.trim().to_string(),
            self.purpose.id.trim().to_string(),
        );
        if self.subscription_key.as_ref() != Some(&key) {
            info!(pet_id = %key.0, visit_type = %key.1, "fetching subscription details");
            let details = self.backend.subscription_for(&key.0, &key.1).await?;
            self.subscription = details;
            self.subscription_key = Some(key);
        }
        Ok(self.subscription.as_ref())
    }

    /// The form can only change while nothing is waiting on the submitted draft.
    fn ensure_editable(&self) -> Result<()> {
        match self.state {
            BookingState::Idle | BookingState::Failed(_) => Ok(()),
            BookingState::Saved => Err(BookingError::InvalidState(
                "This visit has already been saved".to_string(),
            )),
            _ => Err(BookingError::InvalidState(
                "Close the payment dialog before changing the booking".to_string(),
            )),
        }
    }

    /// Applies text typed into the discount field; see [`DiscountField::apply`].
    ///
    /// Returns whether the input was accepted.
    pub fn set_discount(&mut self, input: &str) -> Result<bool> {
        self.ensure_editable()?;
        let accepted = self.discount.apply(input);
        if !accepted {
            warn!(input, max = %self.discount.max(), "discount rejected");
        }
        Ok(accepted)
    }

    /// Switches between using a subscription session and paying for the visit.
    ///
    /// Returns whether a session is now being used. A session can only be used
    /// when the subscription has sessions left and names its plan.
    pub fn toggle_subscription(&mut self) -> Result<bool> {
        self.ensure_editable()?;
        if self.subscription_availed {
            self.subscription_availed = false;
            self.plan_id = None;
            return Ok(false);
        }

        let subscription = self.subscription.as_ref().ok_or_else(|| {
            BookingError::Validation(
                "This pet doesn't have an active subscription for grooming services".to_string(),
            )
        })?;
        if !subscription.has_sessions() {
            return Err(BookingError::Validation(
                "No grooming sessions left on this subscription".to_string(),
            ));
        }
        let plan_id = subscription.plan_id().ok_or_else(|| {
            BookingError::Validation("Subscription plan is missing".to_string())
        })?;

        self.plan_id = Some(plan_id.to_string());
        self.subscription_availed = true;
        Ok(true)
    }

    /// Submits the form.
    ///
    /// Free visits are saved straight away with payment collected after the
    /// service; anything else waits for a payment choice.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        match self.state {
            BookingState::Saved => {
                return Err(BookingError::InvalidState(
                    "This visit has already been saved".to_string(),
                ));
            }
            BookingState::Verifying | BookingState::Persisting => {
                return Err(BookingError::InvalidState(
                    "A submission is already in progress".to_string(),
                ));
            }
            _ => {}
        }
        self.validate_ids()?;

        let draft = DraftVisit::new(
            &self.pet_id,
            &self.purpose,
            self.discount.value(),
            self.subscription_availed,
            self.plan_id.clone(),
        );
        info!(
            pet_id = %draft.pet_id,
            visit_type = %draft.visit_type_id,
            final_price = %draft.final_price,
            subscription = draft.subscription_availed,
            "submitting grooming visit"
        );
        self.draft = Some(draft.clone());

        if !draft.requires_payment() {
            let payment = PaymentRecord::deferred(PaymentType::After, draft.final_price);
            let visit = CreateVisitRequest::from_draft(&draft, payment);
            return self.persist(visit, VISIT_SAVED).await;
        }

        self.state = BookingState::AwaitingPaymentChoice;
        Ok(SubmitOutcome::PaymentChoiceRequired {
            total: draft.final_price,
        })
    }

    pub async fn choose_payment(&mut self, option: PaymentOption) -> Result<SubmitOutcome> {
        if self.state != BookingState::AwaitingPaymentChoice {
            return Err(BookingError::InvalidState(
                "No payment choice is pending".to_string(),
            ));
        }
        let draft = self.pending_draft()?;
        info!(?option, "payment option selected");

        match option {
            PaymentOption::PayLater => {
                let payment = PaymentRecord::deferred(PaymentType::After, draft.final_price);
                let visit = CreateVisitRequest::from_draft(&draft, payment);
                self.persist(visit, VISIT_SAVED).await
            }
            PaymentOption::PayInFull => {
                self.collect(&draft, PaymentType::Advance, draft.final_price, Rupees::ZERO)
                    .await
            }
            PaymentOption::PayPartial => {
                self.state = BookingState::AwaitingPartialAmounts;
                Ok(SubmitOutcome::PartialAmountsRequired {
                    total: draft.final_price,
                    suggested: PartialSplit::suggested(draft.final_price),
                })
            }
        }
    }

    /// Confirms the advance / remaining split and collects the advance.
    pub async fn confirm_partial(
        &mut self,
        advance: Rupees,
        remaining: Rupees,
    ) -> Result<SubmitOutcome> {
        if self.state != BookingState::AwaitingPartialAmounts {
            return Err(BookingError::InvalidState(
                "No partial payment is pending".to_string(),
            ));
        }
        let draft = self.pending_draft()?;
        let split = PartialSplit::new(advance, remaining, draft.final_price)?;
        self.collect(&draft, PaymentType::Partial, split.advance(), split.remaining())
            .await
    }

    /// Closes the payment dialogs without saving anything.
    pub fn cancel_payment_choice(&mut self) {
        if matches!(
            self.state,
            BookingState::AwaitingPaymentChoice | BookingState::AwaitingPartialAmounts
        ) {
            self.state = BookingState::Idle;
        }
    }

    fn pending_draft(&self) -> Result<DraftVisit> {
        self.draft
            .clone()
            .ok_or_else(|| BookingError::InvalidState("No visit has been submitted".to_string()))
    }

    async fn collect(
        &mut self,
        draft: &DraftVisit,
        payment_type: PaymentType,
        paid_now: Rupees,
        remaining: Rupees,
    ) -> Result<SubmitOutcome> {
        let order = OrderRequest {
            receipt: format!("pet_grooming_{}", draft.pet_id),
            amount: paid_now,
            notes: OrderNotes {
                pet_id: draft.pet_id.clone(),
                visit_type: draft.visit_type_id.clone(),
                payment_type,
            },
        };
        let ordered = self.gateway.create_order(&order).await;
        let handle = match ordered {
            Ok(handle) => handle,
            Err(kind) => return Err(self.gateway_failed(kind)),
        };

        let checkout = CheckoutRequest {
            order: handle,
            amount: paid_now,
            description: checkout_description(payment_type, paid_now, remaining),
            prefill: self
                .subscription
                .as_ref()
                .and_then(|s| s.owner())
                .cloned()
                .unwrap_or_default(),
        };
        info!(order_id = %checkout.order.id, amount = %paid_now, %payment_type, "opening checkout");
        let checked_out = self.gateway.open_checkout(&checkout).await;
        let transaction = match checked_out {
            Ok(transaction) => transaction,
            Err(kind) => return Err(self.gateway_failed(kind)),
        };

        let payment = PaymentRecord::collected(
            payment_type,
            paid_now,
            remaining,
            &transaction,
            Utc::now(),
        );
        let visit = CreateVisitRequest::from_draft(draft, payment);
        let request = VerifyPaymentRequest {
            transaction,
            visit: visit.clone(),
        };

        self.state = BookingState::Verifying;
        let verdict = match self.backend.verify_payment(&request).await {
            Ok(ack) if ack.success => Ok(()),
            Ok(ack) => Err(ack
                .message
                .unwrap_or_else(|| "Payment verification failed".to_string())),
            Err(err) => Err(err.user_message()),
        };
        if let Err(message) = verdict {
            warn!(payment_id = %request.transaction.payment_id, %message, "payment verification failed");
            self.state = BookingState::AwaitingPaymentChoice;
            return Err(BookingError::Verification(message));
        }

        self.persist(visit, PAID_AND_SAVED).await
    }

    fn gateway_failed(&mut self, kind: GatewayErrorKind) -> BookingError {
        warn!(error = %kind, "payment gateway error");
        self.state = BookingState::AwaitingPaymentChoice;
        BookingError::Gateway(kind)
    }

    async fn persist(&mut self, visit: CreateVisitRequest, success: &str) -> Result<SubmitOutcome> {
        self.state = BookingState::Persisting;
        let saved = self.backend.create_grooming_visit(&visit).await;
        let failure = match saved {
            Ok(ack) if ack.success => {
                info!(pet_id = %visit.pet_id, payment_type = %visit.details.payment.payment_type, "visit saved");
                self.saved = Some(visit);
                self.state = BookingState::Saved;
                return Ok(SubmitOutcome::Saved {
                    message: success.to_string(),
                });
            }
            Ok(ack) => ack
                .message
                .unwrap_or_else(|| "Failed to save visit".to_string()),
            Err(err) => err.user_message(),
        };
        warn!(message = %failure, "saving visit failed");
        self.state = BookingState::Failed(failure.clone());
        Err(BookingError::Persist(failure))
    }
}
