//! Text formats for a [`Snapshot`]: CSV tables for downstream training tools, and a
//! human-readable report.
//!
//! Everything here writes to a [`fmt::Write`], so it can fill a [`String`](alloc::string::String)
//! or be adapted to a file by the caller.

use alloc::string::String;
use core::fmt::{self, Write as _};

use crate::Snapshot;
use crate::math::{FreeCoordinate, WorldPoint};
use crate::probe::Classification;
use crate::registry::VertexRecord;

/// Header line of both CSV layouts.
pub const CSV_HEADER: &str = "Order,\
    Position_x,Position_y,Position_z,\
    Owner_ID,Distance_to_Camera,Connected_Vertices,\
    Bottom_Left_x,Bottom_Left_y,Bottom_Left_z,\
    Top_Left_x,Top_Left_y,Top_Left_z,\
    Top_Right_x,Top_Right_y,Top_Right_z,\
    Bottom_Right_x,Bottom_Right_y,Bottom_Right_z,\
    Frustum_Apex_x,Frustum_Apex_y,Frustum_Apex_z,\
    Is_Visible,Out_Of_Frame,BehindAMesh";

/// Which columns [`write_csv`] fills in.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::exhaustive_enums)]
pub enum CsvLayout {
    /// Every column, ending with the visible, out-of-frame, and occluded flags as `1`/`0`.
    #[default]
    Learning,
    /// The same header, but rows stop after the frustum apex (with a trailing comma) and
    /// leave the three flag columns for a prediction tool to fill.
    Control,
}

/// Writes `snapshot` as CSV: a [`CSV_HEADER`] line, then one line per vertex in ordinal
/// order.
///
/// Numbers are written in the shortest form that reads back exactly, with `.` as the
/// decimal separator. Neighbor IDs are separated by spaces within their single column.
pub fn write_csv(out: &mut dyn fmt::Write, snapshot: &Snapshot, layout: CsvLayout) -> fmt::Result {
    writeln!(out, "{CSV_HEADER}")?;

    // The frustum columns are the same on every row.
    let mut frustum_columns = String::new();
    let frustum = snapshot.frustum();
    for point in frustum.corners().into_iter().chain([frustum.apex]) {
        for c in point.to_array() {
            write!(frustum_columns, "{},", Number(c))?;
        }
    }

    for vertex in snapshot.vertices() {
        let position = vertex.position();
        write!(
            out,
            "{id},{x},{y},{z},{owner},{distance},{neighbors},{frustum_columns}",
            id = vertex.id(),
            x = Number(position.x),
            y = Number(position.y),
            z = Number(position.z),
            owner = vertex.owner(),
            distance = Number(vertex.distance_to_camera()),
            neighbors = Neighbors(vertex, " "),
        )?;
        match layout {
            CsvLayout::Learning => {
                let classification = vertex.classification();
                let flag = |f: fn(Classification) -> bool| u8::from(classification.is_some_and(f));
                writeln!(
                    out,
                    "{},{},{}",
                    flag(Classification::is_visible),
                    flag(Classification::is_out_of_frame),
                    flag(Classification::is_occluded_by_mesh),
                )?;
            }
            CsvLayout::Control => writeln!(out)?,
        }
    }
    Ok(())
}

/// Writes `snapshot` as a plain-text report with the sections "Camera Info", "All Vertices",
/// and "Visible Vertices". Vectors are shown with two decimal places.
pub fn write_report(out: &mut dyn fmt::Write, snapshot: &Snapshot) -> fmt::Result {
    let frustum = snapshot.frustum();
    writeln!(out, "Camera Info:")?;
    writeln!(out, "Bottom Left: {}", Vector(frustum.bottom_left))?;
    writeln!(out, "Top Left: {}", Vector(frustum.top_left))?;
    writeln!(out, "Top Right: {}", Vector(frustum.top_right))?;
    writeln!(out, "Bottom Right: {}", Vector(frustum.bottom_right))?;
    writeln!(out, "Frustum Apex: {}", Vector(frustum.apex))?;

    writeln!(out, "All Vertices:")?;
    for vertex in snapshot.vertices() {
        writeln!(
            out,
            "Order: {id}, Position: {position}, Owner ID: {owner}, \
            Distance to Camera: {distance}, Connected Vertices: {neighbors}",
            id = vertex.id(),
            position = Vector(vertex.position()),
            owner = vertex.owner(),
            distance = Number(vertex.distance_to_camera()),
            neighbors = Neighbors(vertex, ", "),
        )?;
    }

    writeln!(out, "Visible Vertices:")?;
    for vertex in snapshot.visible_vertices() {
        writeln!(
            out,
            "Order: {id}, Position: {position}",
            id = vertex.id(),
            position = Vector(vertex.position()),
        )?;
    }
    Ok(())
}

/// Formats a coordinate with `-0` written as `0`.
struct Number(FreeCoordinate);

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&(self.0 + 0.0), f)
    }
}

/// Formats a point as `(x, y, z)` with two decimal places.
struct Vector(WorldPoint);

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.0.to_array().map(|c| c + 0.0);
        write!(f, "({x:.2}, {y:.2}, {z:.2})")
    }
}

/// Formats a vertex's neighbor IDs joined by a separator.
struct Neighbors<'a>(&'a VertexRecord, &'static str);

impl fmt::Display for Neighbors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.neighbors().iter().enumerate() {
            if i > 0 {
                f.write_str(self.1)?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}
