//! Running many independent pipeline invocations.
//!
//! Runs share nothing, so with the `parallel` feature they are spread over
//! the rayon thread pool. Results come back in input order and a failure in
//! one run never affects another.

use crate::{strip_metadata_with, EncodedOutput, ImageBytes, Result, StripOptions};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Strip every input, returning one result per input in the same order.
#[cfg(feature = "parallel")]
pub fn strip_batch(inputs: Vec<ImageBytes>, options: &StripOptions) -> Vec<Result<EncodedOutput>> {
    inputs
        .into_par_iter()
        .map(|input| strip_metadata_with(input, options))
        .collect()
}

/// Strip every input, returning one result per input in the same order.
#[cfg(not(feature = "parallel"))]
pub fn strip_batch(inputs: Vec<ImageBytes>, options: &StripOptions) -> Vec<Result<EncodedOutput>> {
    inputs
        .into_iter()
        .map(|input| strip_metadata_with(input, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Codec, PngCodec};
    use crate::{DecodedRaster, PixelLayout, StripError};

    fn png(width: u32) -> Vec<u8> {
        let raster =
            DecodedRaster::new(width, 1, PixelLayout::L8, vec![1; width as usize]).unwrap();
        PngCodec::default().encode(&raster, 0).unwrap()
    }

    #[test]
    fn test_order_and_isolation() {
        let inputs = vec![
            ImageBytes::new(png(3)).with_filename("a.png"),
            ImageBytes::new(vec![1, 2, 3]),
            ImageBytes::new(png(5)).with_filename("c.png"),
            ImageBytes::new(Vec::new()),
        ];

        let results = strip_batch(inputs, &StripOptions::default());

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().width, 3);
        assert!(matches!(results[1], Err(StripError::UnsupportedFormat { .. })));
        assert_eq!(results[2].as_ref().unwrap().filename, "cleaned-c.png");
        assert!(matches!(results[3], Err(StripError::MissingInput)));
    }

    #[test]
    fn test_empty_batch() {
        assert!(strip_batch(Vec::new(), &StripOptions::default()).is_empty());
    }
}
