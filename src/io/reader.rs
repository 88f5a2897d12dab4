use crate::common::event::{ClientRecord, TransactionEvent};
use std::io::Read;

/// Reads daily transaction rows from a CSV reader, in file order.
///
/// Expected headers: `Client,Amount`, with `Amount` a signed integer in minor
/// units. Rows with a positive amount become deposits; zero and negative
/// amounts become withdrawals of the absolute value. Errors carry the line
/// number of the offending row.
///
/// # Examples
///
/// ```
/// use transaction_ledger::io::reader::read_records;
/// use transaction_ledger::common::event::TransactionEvent;
/// use csv::ReaderBuilder;
///
/// let data = "Client,Amount\n\
/// Smith,1500\n\
/// Smith,-1000\n";
/// let mut rdr = ReaderBuilder::new().from_reader(data.as_bytes());
/// let events: Vec<_> = read_records(&mut rdr).collect();
///
/// assert!(matches!(events[0], Ok(TransactionEvent::Deposit { .. })));
/// assert!(matches!(events[1], Ok(TransactionEvent::Withdrawal { .. })));
/// ```
pub fn read_records<R: Read>(
    rdr: &mut csv::Reader<R>,
) -> impl Iterator<Item = Result<TransactionEvent, String>> + '_ {
    rdr.deserialize::<ClientRecord>().map(|res| {
        let record = res.map_err(|e| match e.position() {
            Some(pos) => format!("invalid record on line {}: {}", pos.line(), e),
            None => format!("invalid record: {e}"),
        })?;
        let client = record.client.trim();
        if client.is_empty() {
            return Err(format!("empty client name for amount {}", record.amount));
        }
        Ok(TransactionEvent::from(ClientRecord::new(client, record.amount)))
    })
}
