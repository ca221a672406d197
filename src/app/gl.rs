//! WebGL2 drawing for the icon scene and the preloader star field.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use js_sys::{Float32Array, Uint32Array};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::config::CameraConfig;
use crate::particles::ParticleField;
use crate::scene::{sort_for_blending, DrawItem, Geometry};

const PARTICLE_FOV_DEG: f32 = 75.0;
const PARTICLE_EYE_Z: f32 = 500.0;
const PARTICLE_OPACITY: f32 = 0.8;

#[derive(Error, Debug)]
pub enum GlError {
    #[error("WebGL2 is not available")]
    Unsupported,
    #[error("couldn't create {0}")]
    Create(&'static str),
    #[error("shader compilation failed: {0}")]
    Compile(String),
    #[error("shader program link failed: {0}")]
    Link(String),
    #[error("{0}")]
    Js(String),
}

impl From<JsValue> for GlError {
    fn from(value: JsValue) -> Self {
        GlError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

fn context(canvas: &HtmlCanvasElement) -> Result<GL, GlError> {
    canvas
        .get_context("webgl2")?
        .ok_or(GlError::Unsupported)?
        .dyn_into::<GL>()
        .map_err(|_| GlError::Unsupported)
}

/// Matches the drawing buffer to the canvas' CSS size. Returns the aspect ratio.
fn fit_canvas(gl: &GL) -> f32 {
    let Some(canvas) = gl
        .canvas()
        .and_then(|c| c.dyn_into::<HtmlCanvasElement>().ok())
    else {
        return 1.0;
    };
    let ratio = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0);
    let width = (canvas.client_width() as f64 * ratio) as u32;
    let height = (canvas.client_height() as f64 * ratio) as u32;
    if width > 0 && height > 0 && (canvas.width() != width || canvas.height() != height) {
        canvas.set_width(width);
        canvas.set_height(height);
    }
    gl.viewport(0, 0, canvas.width() as i32, canvas.height() as i32);
    if canvas.height() == 0 {
        1.0
    } else {
        canvas.width() as f32 / canvas.height() as f32
    }
}

fn compile_shader(gl: &GL, src: &str, shader_type: u32) -> Result<WebGlShader, GlError> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or(GlError::Create("shader"))?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    if !gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        return Err(GlError::Compile(
            gl.get_shader_info_log(&shader).unwrap_or_default(),
        ));
    }
    Ok(shader)
}

fn link_program(gl: &GL, vert_src: &str, frag_src: &str) -> Result<WebGlProgram, GlError> {
    let vert = compile_shader(gl, vert_src, GL::VERTEX_SHADER)?;
    let frag = compile_shader(gl, frag_src, GL::FRAGMENT_SHADER)?;
    let program = gl.create_program().ok_or(GlError::Create("program"))?;
    gl.attach_shader(&program, &vert);
    gl.attach_shader(&program, &frag);
    gl.link_program(&program);
    if !gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        return Err(GlError::Link(
            gl.get_program_info_log(&program).unwrap_or_default(),
        ));
    }
    Ok(program)
}

/// Uploads `data` into a new buffer bound to attribute `location`.
fn float_attribute(gl: &GL, location: u32, size: i32, data: &[f32]) -> Result<WebGlBuffer, GlError> {
    let buffer = gl.create_buffer().ok_or(GlError::Create("buffer"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &Float32Array::from(data), GL::STATIC_DRAW);
    gl.enable_vertex_attrib_array(location);
    gl.vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, 0, 0);
    Ok(buffer)
}

fn flatten(vectors: &[[f32; 3]]) -> Vec<f32> {
    vectors.iter().flatten().copied().collect()
}

const MESH_VERT: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
uniform mat4 u_view_projection;
uniform mat4 u_model;
out vec3 v_normal;
void main() {
    v_normal = mat3(u_model) * a_normal;
    gl_Position = u_view_projection * u_model * vec4(a_position, 1.0);
}
"#;

const MESH_FRAG: &str = r#"#version 300 es
precision mediump float;
in vec3 v_normal;
uniform vec4 u_color;
uniform float u_opacity;
out vec4 o_color;
void main() {
    vec3 n = normalize(v_normal);
    vec3 key = normalize(vec3(10.0, 10.0, 5.0));
    vec3 fill = normalize(vec3(-10.0, -10.0, -5.0));
    float sky = n.y * 0.5 + 0.5;
    float light = 0.55 + 0.3 * sky
        + 0.6 * max(dot(n, key), 0.0)
        + 0.35 * max(dot(n, fill), 0.0);
    o_color = vec4(u_color.rgb * light, u_color.a * u_opacity);
}
"#;

struct GpuMesh {
    vao: WebGlVertexArrayObject,
    buffers: [WebGlBuffer; 3],
    count: i32,
    // holds the address used as the map key
    _geometry: Arc<Geometry>,
}

/// Draws the background icons with a single lit, alpha blended program.
pub struct IconRenderer {
    gl: GL,
    program: WebGlProgram,
    view_projection: Option<WebGlUniformLocation>,
    model: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
    camera: CameraConfig,
    meshes: HashMap<usize, GpuMesh>,
}

impl IconRenderer {
    pub fn new(canvas: &HtmlCanvasElement, camera: CameraConfig) -> Result<Self, GlError> {
        let gl = context(canvas)?;
        let program = link_program(&gl, MESH_VERT, MESH_FRAG)?;
        Ok(Self {
            view_projection: gl.get_uniform_location(&program, "u_view_projection"),
            model: gl.get_uniform_location(&program, "u_model"),
            color: gl.get_uniform_location(&program, "u_color"),
            opacity: gl.get_uniform_location(&program, "u_opacity"),
            gl,
            program,
            camera,
            meshes: HashMap::new(),
        })
    }

    fn upload(&mut self, geometry: &Arc<Geometry>) -> Result<usize, GlError> {
        let key = Arc::as_ptr(geometry) as usize;
        if self.meshes.contains_key(&key) {
            return Ok(key);
        }
        let gl = &self.gl;
        let vao = gl
            .create_vertex_array()
            .ok_or(GlError::Create("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));
        let positions = float_attribute(gl, 0, 3, &flatten(&geometry.positions))?;
        let normals = float_attribute(gl, 1, 3, &flatten(&geometry.normals))?;
        let indices = gl.create_buffer().ok_or(GlError::Create("buffer"))?;
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&indices));
        gl.buffer_data_with_array_buffer_view(
            GL::ELEMENT_ARRAY_BUFFER,
            &Uint32Array::from(geometry.indices.as_slice()),
            GL::STATIC_DRAW,
        );
        gl.bind_vertex_array(None);

        self.meshes.insert(
            key,
            GpuMesh {
                vao,
                buffers: [positions, normals, indices],
                count: geometry.indices.len() as i32,
                _geometry: Arc::clone(geometry),
            },
        );
        Ok(key)
    }

    fn view_projection(&self, aspect: f32) -> Mat4 {
        let eye = self.camera.eye();
        let view = Mat4::look_at_rh(eye, eye - Vec3::Z, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(
            self.camera.fov_radians(),
            aspect,
            self.camera.near,
            self.camera.far,
        );
        projection * view
    }

    pub fn render(&mut self, mut items: Vec<DrawItem>) -> Result<(), GlError> {
        let aspect = fit_canvas(&self.gl);
        sort_for_blending(&mut items, self.camera.eye());
        let mut keys = Vec::with_capacity(items.len());
        for item in &items {
            keys.push(self.upload(&item.geometry)?);
        }

        let gl = &self.gl;
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        gl.enable(GL::DEPTH_TEST);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
        gl.use_program(Some(&self.program));
        gl.uniform_matrix4fv_with_f32_array(
            self.view_projection.as_ref(),
            false,
            &self.view_projection(aspect).to_cols_array(),
        );

        for (item, key) in items.iter().zip(keys) {
            let opacity = item.opacity();
            if opacity <= 0.0 {
                continue;
            }
            // faded icons still test depth but must not hide what is drawn after them
            gl.depth_mask(!item.is_blended());
            let Some(mesh) = self.meshes.get(&key) else {
                continue;
            };
            gl.uniform_matrix4fv_with_f32_array(self.model.as_ref(), false, &item.world.to_cols_array());
            gl.uniform4fv_with_f32_array(self.color.as_ref(), &item.material.base_color);
            gl.uniform1f(self.opacity.as_ref(), opacity);
            gl.bind_vertex_array(Some(&mesh.vao));
            gl.draw_elements_with_i32(GL::TRIANGLES, mesh.count, GL::UNSIGNED_INT, 0);
        }
        gl.bind_vertex_array(None);
        gl.depth_mask(true);
        Ok(())
    }
}

impl Drop for IconRenderer {
    fn drop(&mut self) {
        for (_, mesh) in self.meshes.drain() {
            for buffer in &mesh.buffers {
                self.gl.delete_buffer(Some(buffer));
            }
            self.gl.delete_vertex_array(Some(&mesh.vao));
        }
        self.gl.delete_program(Some(&self.program));
    }
}

const POINTS_VERT: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
layout(location = 2) in float a_size;
uniform mat4 u_view_projection;
uniform mat4 u_model;
uniform float u_pixels;
out vec3 v_color;
void main() {
    vec4 clip = u_view_projection * u_model * vec4(a_position, 1.0);
    gl_Position = clip;
    gl_PointSize = max(a_size * u_pixels / max(clip.w, 1.0), 1.0);
    v_color = a_color;
}
"#;

const POINTS_FRAG: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
uniform float u_opacity;
out vec4 o_color;
void main() {
    if (length(gl_PointCoord - vec2(0.5)) > 0.5) {
        discard;
    }
    o_color = vec4(v_color, u_opacity);
}
"#;

/// Additive point sprites for the preloader background.
pub struct ParticleRenderer {
    gl: GL,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    buffers: [WebGlBuffer; 3],
    count: i32,
    view_projection: Option<WebGlUniformLocation>,
    model: Option<WebGlUniformLocation>,
    pixels: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
}

impl ParticleRenderer {
    pub fn new(canvas: &HtmlCanvasElement, field: &ParticleField) -> Result<Self, GlError> {
        let gl = context(canvas)?;
        let program = link_program(&gl, POINTS_VERT, POINTS_FRAG)?;
        let vao = gl
            .create_vertex_array()
            .ok_or(GlError::Create("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));
        let buffers = [
            float_attribute(&gl, 0, 3, &field.positions)?,
            float_attribute(&gl, 1, 3, &field.colors)?,
            float_attribute(&gl, 2, 1, &field.sizes)?,
        ];
        gl.bind_vertex_array(None);

        Ok(Self {
            view_projection: gl.get_uniform_location(&program, "u_view_projection"),
            model: gl.get_uniform_location(&program, "u_model"),
            pixels: gl.get_uniform_location(&program, "u_pixels"),
            opacity: gl.get_uniform_location(&program, "u_opacity"),
            count: field.len() as i32,
            gl,
            program,
            vao,
            buffers,
        })
    }

    pub fn render(&self, field: &ParticleField) {
        let gl = &self.gl;
        let aspect = fit_canvas(gl);
        let fov = PARTICLE_FOV_DEG.to_radians();
        let eye = Vec3::new(0.0, 0.0, PARTICLE_EYE_Z);
        let view_projection = Mat4::perspective_rh_gl(fov, aspect, 0.1, 1000.0)
            * Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let pixels = gl.drawing_buffer_height() as f32 / (2.0 * (fov / 2.0).tan());

        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.disable(GL::DEPTH_TEST);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE);
        gl.use_program(Some(&self.program));
        gl.uniform_matrix4fv_with_f32_array(
            self.view_projection.as_ref(),
            false,
            &view_projection.to_cols_array(),
        );
        gl.uniform_matrix4fv_with_f32_array(self.model.as_ref(), false, &field.model_matrix().to_cols_array());
        gl.uniform1f(self.pixels.as_ref(), pixels);
        gl.uniform1f(self.opacity.as_ref(), PARTICLE_OPACITY);
        gl.bind_vertex_array(Some(&self.vao));
        gl.draw_arrays(GL::POINTS, 0, self.count);
        gl.bind_vertex_array(None);
    }
}

impl Drop for ParticleRenderer {
    fn drop(&mut self) {
        for buffer in &self.buffers {
            self.gl.delete_buffer(Some(buffer));
        }
        self.gl.delete_vertex_array(Some(&self.vao));
        self.gl.delete_program(Some(&self.program));
    }
}
