//! Binary project codec.
//!
//! Little-endian throughout. Strings carry a 7-bit variable-length length
//! prefix. The layout is a 2-byte version tag followed by the project tree
//! in a fixed field order; see [`crate::state::migration`] for what each
//! version contains.
//!
//! Decoding is all-or-nothing: the complete tree is read and validated
//! before a [`Project`] is returned.

use std::fs;
use std::path::Path;

use log::info;
use sha2::{Digest, Sha256};

use crate::error::{FramelineError, Result};
use crate::interp::InterpolationMode;
use crate::rig::{Camera, CameraState, FigureState, Joint, JointPose, Rig, State, Vec2};
use crate::state::migration::{self, FormatLayout, FORMAT_VERSION};
use crate::timeline::{Frameset, Keyframe, Layer, LayerData, LayerKind, Project};

const PAYLOAD_FIGURE: u8 = 0;
const PAYLOAD_CAMERA: u8 = 1;

const STATE_FIGURE: u8 = 0;
const STATE_CAMERA: u8 = 1;

/// Upper bound on element counts.
const MAX_COUNT: u32 = 1 << 24;

// Smallest encodings of each repeated element, used to cap pre-allocation
// at what the remaining input could actually hold.
const MIN_LAYER_BYTES: usize = 12;
const MIN_FRAMESET_BYTES: usize = 14;
const MIN_KEYFRAME_BYTES: usize = 5;
const MIN_JOINT_BYTES: usize = 22;
const MIN_JOINT_POSE_BYTES: usize = 12;

// ============================================================================
// Public API
// ============================================================================

/// Encode a project in the current format version.
pub fn encode(project: &Project) -> Vec<u8> {
    let mut w = Writer::default();
    w.u16(FORMAT_VERSION);
    w.f32(project.frame_rate);
    w.f32(project.playback_speed);
    w.u32(project.layer_count() as u32);
    for layer in project.layers() {
        write_layer(&mut w, layer);
    }
    w.into_bytes()
}

/// Decode a project, dispatching on its version tag.
///
/// # Errors
/// `UnsupportedVersion` for unknown tags, `Format` for truncated or
/// structurally invalid data (including trailing bytes).
pub fn decode(bytes: &[u8]) -> Result<Project> {
    let mut r = Reader::new(bytes);
    let layout = migration::layout_for(r.u16()?)?;

    let frame_rate = r.f32()?;
    let playback_speed = if layout.playback_speed {
        r.f32()?
    } else {
        crate::config::DEFAULT_PLAYBACK_SPEED
    };

    let layer_count = r.count()?;
    let mut layers = Vec::with_capacity(r.capacity(layer_count, MIN_LAYER_BYTES));
    for index in 0..layer_count {
        layers.push(read_layer(&mut r, &layout, index)?);
    }

    if !r.is_at_end() {
        return Err(FramelineError::format(format!(
            "{} trailing bytes after project",
            r.remaining()
        )));
    }

    Project::from_parts(frame_rate, playback_speed, layers).map_err(into_format)
}

/// Read only the version tag of an encoded project.
pub fn peek_version(bytes: &[u8]) -> Result<u16> {
    Reader::new(bytes).u16()
}

/// SHA-256 of the encoded project, as lowercase hex.
pub fn digest(project: &Project) -> String {
    format!("{:x}", Sha256::digest(encode(project)))
}

/// Write a project file.
pub fn save_project(project: &Project, path: &Path) -> Result<()> {
    let bytes = encode(project);
    fs::write(path, &bytes).map_err(|e| FramelineError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(
        "Saved project to {} ({} layers, {} bytes)",
        path.display(),
        project.layer_count(),
        bytes.len()
    );
    Ok(())
}

/// Read a project file.
pub fn load_project(path: &Path) -> Result<Project> {
    let bytes = fs::read(path).map_err(|e| FramelineError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let project = decode(&bytes)?;
    info!(
        "Loaded project from {} ({} layers)",
        path.display(),
        project.layer_count()
    );
    Ok(project)
}

// ============================================================================
// Encoding
// ============================================================================

#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn bool(&mut self, v: bool) {
        self.u8(v as u8);
    }

    fn vec2(&mut self, v: Vec2) {
        self.f32(v.x);
        self.f32(v.y);
    }

    fn str(&mut self, s: &str) {
        let mut len = s.len();
        loop {
            let byte = (len & 0x7f) as u8;
            len >>= 7;
            if len == 0 {
                self.u8(byte);
                break;
            }
            self.u8(byte | 0x80);
        }
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

fn write_layer(w: &mut Writer, layer: &Layer) {
    w.u8(layer.kind().tag());
    w.str(&layer.name);
    w.bool(layer.visible);
    w.u32(layer.depth);
    write_payload(w, layer.data());
    w.u32(layer.framesets().len() as u32);
    for frameset in layer.framesets() {
        w.u32(frameset.len() as u32);
        for keyframe in frameset.keyframes() {
            w.u32(keyframe.time);
            write_state(w, &keyframe.state);
            w.u8(keyframe.mode.tag());
        }
    }
}

fn write_payload(w: &mut Writer, data: &LayerData) {
    match data {
        LayerData::Figure(rig) => {
            w.u8(PAYLOAD_FIGURE);
            w.u32(rig.len() as u32);
            for joint in rig.joints() {
                w.str(&joint.name);
                w.i32(joint.parent.map(|p| p as i32).unwrap_or(-1));
                w.vec2(joint.offset);
                w.f32(joint.thickness);
                for channel in joint.handle_color {
                    w.u8(channel);
                }
                w.bool(joint.is_circle);
            }
        }
        LayerData::Camera(camera) => {
            w.u8(PAYLOAD_CAMERA);
            w.u32(camera.width);
            w.u32(camera.height);
        }
    }
}

fn write_state(w: &mut Writer, state: &State) {
    match state {
        State::Figure(figure) => {
            w.u8(STATE_FIGURE);
            w.u32(figure.joints.len() as u32);
            for pose in &figure.joints {
                w.vec2(pose.location);
                w.f32(pose.thickness);
            }
        }
        State::Camera(camera) => {
            w.u8(STATE_CAMERA);
            w.vec2(camera.location);
            w.f32(camera.zoom);
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        let slice = self.data.get(self.pos..end).ok_or_else(|| {
            FramelineError::format(format!("unexpected end of data at offset {}", self.pos))
        })?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    fn bool(&mut self) -> Result<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(FramelineError::format(format!(
                "invalid boolean byte {} at offset {}",
                other,
                self.pos - 1
            ))),
        }
    }

    fn vec2(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.f32()?, self.f32()?))
    }

    fn count(&mut self) -> Result<usize> {
        let n = self.u32()?;
        if n > MAX_COUNT {
            return Err(FramelineError::format(format!("implausible count {}", n)));
        }
        Ok(n as usize)
    }

    fn str(&mut self) -> Result<String> {
        let mut len: usize = 0;
        let mut shift = 0;
        loop {
            let byte = self.u8()?;
            len |= ((byte & 0x7f) as usize) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift > 28 {
                return Err(FramelineError::format("string length prefix too long"));
            }
        }
        let end = self.pos + len;
        let bytes = self.data.get(self.pos..end).ok_or_else(|| {
            FramelineError::format(format!("string of {} bytes runs past end of data", len))
        })?;
        let s = std::str::from_utf8(bytes)
            .map_err(|e| FramelineError::format(format!("invalid UTF-8 in string: {}", e)))?
            .to_owned();
        self.pos = end;
        Ok(s)
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Capacity to reserve for `count` elements of at least `min_bytes` each.
    fn capacity(&self, count: usize, min_bytes: usize) -> usize {
        count.min(self.remaining() / min_bytes)
    }

    fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }
}

fn read_layer(r: &mut Reader, layout: &FormatLayout, index: usize) -> Result<Layer> {
    let kind = LayerKind::from_tag(r.u8()?)?;
    let name = r.str()?;
    let visible = r.bool()?;
    let depth = if layout.layer_depth {
        r.u32()?
    } else {
        index as u32
    };
    let data = read_payload(r)?;
    if data.kind() != kind {
        return Err(FramelineError::format(format!(
            "layer '{}' type does not match its payload",
            name
        )));
    }

    let frameset_count = r.count()?;
    let mut framesets = Vec::with_capacity(r.capacity(frameset_count, MIN_FRAMESET_BYTES));
    for _ in 0..frameset_count {
        let keyframe_count = r.count()?;
        let mut keyframes = Vec::with_capacity(r.capacity(keyframe_count, MIN_KEYFRAME_BYTES));
        for _ in 0..keyframe_count {
            let time = r.u32()?;
            let state = read_state(r)?;
            let mode = if layout.interpolation {
                InterpolationMode::from_tag(r.u8()?)?
            } else {
                InterpolationMode::default()
            };
            keyframes.push(Keyframe::new(time, state).with_mode(mode));
        }
        framesets.push(Frameset::new(keyframes).map_err(into_format)?);
    }

    Ok(Layer::new(name, data, framesets)
        .map_err(into_format)?
        .with_visible(visible)
        .with_depth(depth))
}

fn read_payload(r: &mut Reader) -> Result<LayerData> {
    match r.u8()? {
        PAYLOAD_FIGURE => {
            let count = r.count()?;
            let mut joints = Vec::with_capacity(r.capacity(count, MIN_JOINT_BYTES));
            for _ in 0..count {
                let name = r.str()?;
                let parent = match r.i32()? {
                    -1 => None,
                    p if p >= 0 => Some(p as usize),
                    p => {
                        return Err(FramelineError::format(format!(
                            "invalid parent index {}",
                            p
                        )))
                    }
                };
                let offset = r.vec2()?;
                let thickness = r.f32()?;
                let handle_color = [r.u8()?, r.u8()?, r.u8()?, r.u8()?];
                let is_circle = r.bool()?;
                joints.push(Joint {
                    name,
                    parent,
                    offset,
                    thickness,
                    handle_color,
                    is_circle,
                });
            }
            Ok(LayerData::Figure(
                Rig::from_joints(joints).map_err(into_format)?,
            ))
        }
        PAYLOAD_CAMERA => Ok(LayerData::Camera(Camera::new(r.u32()?, r.u32()?))),
        other => Err(FramelineError::format(format!(
            "unknown drawable payload {}",
            other
        ))),
    }
}

fn read_state(r: &mut Reader) -> Result<State> {
    match r.u8()? {
        STATE_FIGURE => {
            let count = r.count()?;
            let mut joints = Vec::with_capacity(r.capacity(count, MIN_JOINT_POSE_BYTES));
            for _ in 0..count {
                joints.push(JointPose {
                    location: r.vec2()?,
                    thickness: r.f32()?,
                });
            }
            Ok(State::Figure(FigureState { joints }))
        }
        STATE_CAMERA => Ok(State::Camera(CameraState {
            location: r.vec2()?,
            zoom: r.f32()?,
        })),
        other => Err(FramelineError::format(format!("unknown state tag {}", other))),
    }
}

/// Structural problems found while decoding are format errors, not edit
/// rejections.
fn into_format(e: FramelineError) -> FramelineError {
    match e {
        FramelineError::InvariantViolation { reason }
        | FramelineError::BoundaryViolation { reason } => FramelineError::Format { reason },
        FramelineError::NotFound { what } => FramelineError::Format { reason: what },
        other => other,
    }
}
