use crate::application::directory::StudentSummary;
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

const HEADER: [&str; 10] = [
    "id",
    "name",
    "roll",
    "contact",
    "room",
    "table",
    "amount",
    "paid",
    "payment_date",
    "due_date",
];

#[derive(Serialize)]
struct SummaryRow<'a> {
    id: u64,
    name: &'a str,
    roll: Option<&'a str>,
    contact: &'a str,
    room: Option<&'a str>,
    table: Option<u32>,
    amount: Option<Decimal>,
    paid: bool,
    payment_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
}

impl<'a> From<&'a StudentSummary> for SummaryRow<'a> {
    fn from(summary: &'a StudentSummary) -> Self {
        Self {
            id: summary.id,
            name: &summary.name,
            roll: summary.roll_code.as_deref(),
            contact: &summary.contact,
            room: summary.room_code.as_deref(),
            table: summary.table_number,
            amount: summary.amount_paid,
            paid: summary.paid,
            payment_date: summary.payment_date,
            due_date: summary.due_date,
        }
    }
}

/// Writes student summaries as CSV. The header is always written, even
/// when there are no students.
pub struct SummaryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_summaries<'a>(
        &mut self,
        summaries: impl IntoIterator<Item = &'a StudentSummary>,
    ) -> Result<()> {
        self.writer.write_record(HEADER)?;
        for summary in summaries {
            self.writer.serialize(SummaryRow::from(summary))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
