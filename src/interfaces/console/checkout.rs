use crate::domain::payment::{GatewayErrorKind, TransactionInfo};
use crate::infrastructure::razorpay::{CheckoutOptions, CheckoutWidget};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

type LineSource = Box<dyn AsyncBufRead + Unpin + Send>;

/// Checkout driven from a terminal.
///
/// Prints the checkout options so the operator can complete the payment in
/// Razorpay's hosted page, then reads back the ids Razorpay returned. An empty
/// payment id cancels the payment.
pub struct ConsoleCheckout {
    input: Mutex<LineSource>,
}

impl ConsoleCheckout {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    pub fn from_reader<R: AsyncBufRead + Unpin + Send + 'static>(reader: R) -> Self {
        Self {
            input: Mutex::new(Box::new(reader)),
        }
    }

    async fn prompt(input: &mut LineSource, label: &str) -> Result<String, GatewayErrorKind> {
        eprint!("{label}: ");
        let mut line = String::new();
        input
            .read_line(&mut line)
            .await
            .map_err(|e| GatewayErrorKind::Unavailable(e.to_string()))?;
        Ok(line.trim().to_string())
    }
}

#[async_trait]
impl CheckoutWidget for ConsoleCheckout {
    async fn collect(&self, options: &CheckoutOptions) -> Result<TransactionInfo, GatewayErrorKind> {
        let rendered = serde_json::to_string_pretty(options)
            .map_err(|e| GatewayErrorKind::Unavailable(e.to_string()))?;
        eprintln!("Razorpay checkout options:\n{rendered}");

        let mut input = self.input.lock().await;
        let payment_id = Self::prompt(&mut input, "razorpay_payment_id (empty to cancel)").await?;
        if payment_id.is_empty() {
            return Err(GatewayErrorKind::Cancelled);
        }
        let order_id = Self::prompt(&mut input, "razorpay_order_id").await?;
        let signature = Self::prompt(&mut input, "razorpay_signature").await?;
        if signature.is_empty() {
            return Err(GatewayErrorKind::Failed {
                code: "MISSING_SIGNATURE".to_string(),
                description: "Payment signature was not provided".to_string(),
            });
        }

        Ok(TransactionInfo {
            payment_id,
            order_id: if order_id.is_empty() {
                options.order_id.clone()
            } else {
                order_id
            },
            signature,
        })
    }
}
