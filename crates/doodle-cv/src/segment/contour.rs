//! External contour extraction

use crate::bbox::from_rect;
use crate::Result;
use anyhow::Context;
use doodle_core::{BoundingBox, Point};
use opencv::{
    core::{self, Mat, Vector},
    imgproc,
};

/// One connected foreground region of a mask
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub bbox: BoundingBox,
    /// Polygon area of the contour, smaller than the box area for anything but solid rectangles
    pub contour_area: f64,
    /// Simplified outline, only filled in by [`simplified_regions`]
    pub outline: Option<Vec<Point>>,
}

fn external_contours(mask: &Mat) -> Result<Vector<Vector<core::Point>>> {
    let mut contours = Vector::<Vector<core::Point>>::new();
    imgproc::find_contours(
        mask,
        &mut contours,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_SIMPLE,
        core::Point::default(),
    )
    .context("Contour extraction failed")?;
    Ok(contours)
}

fn region(contour: &Vector<core::Point>) -> Result<Option<Region>> {
    let rect = imgproc::bounding_rect(contour)?;
    let contour_area = imgproc::contour_area(contour, false)?;

    Ok(from_rect(rect).map(|bbox| Region {
        bbox,
        contour_area,
        outline: None,
    }))
}

/// Outer boundaries of every foreground region. Holes are ignored; an empty mask yields an
/// empty list.
pub fn regions(mask: &Mat) -> Result<Vec<Region>> {
    let mut out = Vec::new();
    for contour in external_contours(mask)? {
        if let Some(region) = region(&contour)? {
            out.push(region);
        }
    }
    Ok(out)
}

/// Like [`regions`], with each outline simplified to a polygon whose tolerance is
/// `epsilon_ratio` × the contour perimeter.
pub fn simplified_regions(mask: &Mat, epsilon_ratio: f64) -> Result<Vec<Region>> {
    let mut out = Vec::new();
    for contour in external_contours(mask)? {
        let Some(mut region) = region(&contour)? else {
            continue;
        };

        let epsilon = epsilon_ratio * imgproc::arc_length(&contour, true)?;
        let mut approx = Vector::<core::Point>::new();
        imgproc::approx_poly_dp(&contour, &mut approx, epsilon, true)
            .context("Polygon simplification failed")?;

        region.outline = Some(approx.iter().map(|p| Point::new(p.x, p.y)).collect());
        out.push(region);
    }
    Ok(out)
}

/// The region with the largest contour area
pub fn largest(regions: Vec<Region>) -> Option<Region> {
    regions
        .into_iter()
        .max_by(|a, b| a.contour_area.total_cmp(&b.contour_area))
}
