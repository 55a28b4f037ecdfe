use bigdecimal::BigDecimal;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HwInput {
    pub hash: String,
    pub index: u32,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HwOutput {
    pub address: String,
    pub coins: BigDecimal,
    pub hours: BigDecimal,
    /// Set for change outputs going back to an address of the device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_index: Option<u32>,
}

/// A line of the on-screen transaction preview.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TxData {
    pub address: String,
    pub coins: BigDecimal,
    pub hours: BigDecimal,
}

/// Lists the outputs the user has to confirm, change outputs are omitted.
pub fn build_tx_preview(outputs: &[HwOutput]) -> Vec<TxData> {
    outputs
        .iter()
        .filter(|output| output.address_index.is_none())
        .map(|output| TxData {
            address: output.address.clone(),
            coins: output.coins.clone(),
            hours: output.hours.clone(),
        })
        .collect()
}

/// Shows the transaction being signed while the device waits for the confirmation.
pub trait TxConfirmation: Send + Sync {
    fn open(&self, preview: Vec<TxData>);

    fn close(&self);
}

/// Keeps the confirmation open until dropped.
pub(crate) struct OpenTxConfirmation<'a>(&'a dyn TxConfirmation);

impl<'a> OpenTxConfirmation<'a> {
    pub(crate) fn open(confirmation: &'a dyn TxConfirmation, outputs: &[HwOutput]) -> OpenTxConfirmation<'a> {
        confirmation.open(build_tx_preview(outputs));
        OpenTxConfirmation(confirmation)
    }
}

impl Drop for OpenTxConfirmation<'_> {
    fn drop(&mut self) { self.0.close(); }
}
