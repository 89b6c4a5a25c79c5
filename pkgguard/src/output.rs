use crate::advisory::Advisory;

pub trait OutputFormatter {
    fn write_results(
        &self,
        advisories: &[Advisory],
        writer: &mut dyn std::io::Write,
    ) -> std::io::Result<()>;
}

pub struct TextOutput;

impl OutputFormatter for TextOutput {
    fn write_results(
        &self,
        advisories: &[Advisory],
        writer: &mut dyn std::io::Write,
    ) -> std::io::Result<()> {
        if advisories.is_empty() {
            writeln!(writer, "no advisories found")?;
            return Ok(());
        }

        for adv in advisories {
            writeln!(writer, "{adv}")?;
        }
        Ok(())
    }
}

pub struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn write_results(
        &self,
        advisories: &[Advisory],
        writer: &mut dyn std::io::Write,
    ) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, advisories)?;
        writeln!(writer)?;
        Ok(())
    }
}

pub fn formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput)
    } else {
        Box::new(TextOutput)
    }
}
