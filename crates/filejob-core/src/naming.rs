//! Download filename derivation

use crate::types::file::SelectedFile;
use crate::types::options::JobOptions;

/// Name for a downloaded result, derived from the options and the first input.
///
/// Extensions come from the input file (or the conversion target), never from
/// the result location.
pub fn derive_filename(options: &JobOptions, inputs: &[SelectedFile]) -> String {
    let first = inputs.first();
    let stem = first.map(SelectedFile::stem).unwrap_or("output");
    let ext = first
        .and_then(SelectedFile::extension)
        .unwrap_or_else(|| "bin".to_string());

    match options {
        JobOptions::CompressImage(_) => format!("{}_compressed.{}", stem, ext),
        JobOptions::ConvertImage(o) => format!("{}_converted.{}", stem, o.target_format),
        JobOptions::ResizeImage(o) => format!("{}_{}x{}.{}", stem, o.width, o.height, ext),
        JobOptions::CompressPdf(_) => format!("{}_compressed.pdf", stem),
        JobOptions::ExtractPdf(o) if o.start_page == o.end_page => {
            format!("{}_page_{}.pdf", stem, o.start_page)
        }
        JobOptions::ExtractPdf(o) => {
            format!("{}_pages_{}-{}.pdf", stem, o.start_page, o.end_page)
        }
        JobOptions::MergePdf => "merged.pdf".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::options::*;

    fn input(name: &str) -> Vec<SelectedFile> {
        vec![SelectedFile::new(name, Vec::<u8>::new(), None)]
    }

    #[test]
    fn test_image_names() {
        let compress = JobOptions::CompressImage(CompressImageOptions::default());
        assert_eq!(derive_filename(&compress, &input("cat.JPG")), "cat_compressed.jpg");

        let convert = JobOptions::ConvertImage(ConvertImageOptions {
            target_format: TargetFormat::Webp,
        });
        assert_eq!(derive_filename(&convert, &input("cat.png")), "cat_converted.webp");

        let resize = JobOptions::ResizeImage(ResizeImageOptions {
            width: 1280,
            height: 720,
            maintain_aspect_ratio: true,
        });
        assert_eq!(derive_filename(&resize, &input("holiday.photo.png")), "holiday.photo_1280x720.png");
    }

    #[test]
    fn test_pdf_names() {
        let compress = JobOptions::CompressPdf(CompressPdfOptions::default());
        assert_eq!(derive_filename(&compress, &input("report.pdf")), "report_compressed.pdf");

        let single = JobOptions::ExtractPdf(ExtractPdfOptions { start_page: 4, end_page: 4 });
        assert_eq!(derive_filename(&single, &input("book.pdf")), "book_page_4.pdf");

        let range = JobOptions::ExtractPdf(ExtractPdfOptions { start_page: 2, end_page: 9 });
        assert_eq!(derive_filename(&range, &input("book.pdf")), "book_pages_2-9.pdf");

        assert_eq!(derive_filename(&JobOptions::MergePdf, &input("a.pdf")), "merged.pdf");
    }

    #[test]
    fn test_missing_input_falls_back() {
        let compress = JobOptions::CompressImage(CompressImageOptions::default());
        assert_eq!(derive_filename(&compress, &[]), "output_compressed.bin");
    }
}
