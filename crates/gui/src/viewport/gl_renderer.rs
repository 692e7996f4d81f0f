use std::collections::{HashMap, HashSet};

use glam::{Mat3, Mat4, Vec3};
use glow::HasContext;

use model_viewer_lib::render::{LineDraw, MeshDraw, RenderList};
use model_viewer_lib::scene::{Geometry, GeometryId, LineGeometry};

// ── GPU handles ──────────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: Option<glow::Buffer>,
    /// Index count when indexed, vertex count otherwise
    count: i32,
}

struct GpuLines {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    mesh_program: glow::Program,
    line_program: glow::Program,
    /// Uploaded triangle geometry keyed by geometry id
    meshes: HashMap<GeometryId, GpuMesh>,
    /// Uploaded edge overlays keyed by geometry id
    lines: HashMap<GeometryId, GpuLines>,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Self {
        let mesh_program = compile_program(gl, MESH_VERT, MESH_FRAG);
        let line_program = compile_program(gl, LINE_VERT, LINE_FRAG);
        Self {
            mesh_program,
            line_program,
            meshes: HashMap::new(),
            lines: HashMap::new(),
        }
    }

    /// Upload geometry seen for the first time and free geometry no longer drawn
    pub fn sync(&mut self, gl: &glow::Context, list: &RenderList) {
        let mut live_meshes = HashSet::new();
        for draw in &list.meshes {
            let id = draw.geometry.id();
            live_meshes.insert(id);
            if !self.meshes.contains_key(&id) {
                self.meshes.insert(id, upload_mesh(gl, &draw.geometry));
            }
        }

        let mut live_lines = HashSet::new();
        for draw in &list.lines {
            let id = draw.geometry.id();
            live_lines.insert(id);
            if !self.lines.contains_key(&id) {
                self.lines.insert(id, upload_lines(gl, &draw.geometry));
            }
        }

        let stale_meshes: Vec<GeometryId> = self
            .meshes
            .keys()
            .filter(|id| !live_meshes.contains(id))
            .copied()
            .collect();
        for id in stale_meshes {
            if let Some(mesh) = self.meshes.remove(&id) {
                delete_mesh(gl, &mesh);
            }
        }

        let stale_lines: Vec<GeometryId> = self
            .lines
            .keys()
            .filter(|id| !live_lines.contains(id))
            .copied()
            .collect();
        for id in stale_lines {
            if let Some(lines) = self.lines.remove(&id) {
                delete_lines(gl, &lines);
            }
        }
    }

    /// Render the frame into `viewport` ([x, y, width, height] in pixels)
    pub fn paint(&self, gl: &glow::Context, list: &RenderList, viewport: [f32; 4]) {
        let [r, g, b] = list.background.to_rgb_f32();
        let vp = list.view_projection;

        unsafe {
            gl.viewport(
                viewport[0] as i32,
                viewport[1] as i32,
                viewport[2] as i32,
                viewport[3] as i32,
            );
            gl.scissor(
                viewport[0] as i32,
                viewport[1] as i32,
                viewport[2] as i32,
                viewport[3] as i32,
            );
            gl.enable(glow::SCISSOR_TEST);

            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);

            // Meshes, pushed back slightly so their edges win the depth test
            gl.enable(glow::POLYGON_OFFSET_FILL);
            gl.polygon_offset(1.0, 1.0);
            gl.use_program(Some(self.mesh_program));
            let lights = &list.lights;
            set_uniform_vec3(gl, self.mesh_program, "u_sky", Vec3::from(lights.sky));
            set_uniform_vec3(gl, self.mesh_program, "u_ground", Vec3::from(lights.ground));
            set_uniform_f32(gl, self.mesh_program, "u_hemi_intensity", lights.hemisphere_intensity);
            set_uniform_vec3(gl, self.mesh_program, "u_hemi_up", lights.hemisphere_up);
            set_uniform_vec3(gl, self.mesh_program, "u_sun", Vec3::from(lights.sun));
            set_uniform_f32(gl, self.mesh_program, "u_sun_intensity", lights.sun_intensity);
            set_uniform_vec3(gl, self.mesh_program, "u_to_sun", lights.to_sun);

            for draw in &list.meshes {
                if let Some(mesh) = self.meshes.get(&draw.geometry.id()) {
                    self.draw_mesh(gl, mesh, draw, &vp);
                }
            }
            gl.disable(glow::POLYGON_OFFSET_FILL);

            // Edge overlays
            gl.use_program(Some(self.line_program));
            gl.line_width(1.0);
            for draw in &list.lines {
                if let Some(lines) = self.lines.get(&draw.geometry.id()) {
                    self.draw_lines(gl, lines, draw, &vp);
                }
            }

            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    unsafe fn draw_mesh(&self, gl: &glow::Context, mesh: &GpuMesh, draw: &MeshDraw, vp: &Mat4) {
        let normal_matrix = Mat3::from_mat4(draw.world).inverse().transpose();
        set_uniform_mat4(gl, self.mesh_program, "u_mvp", &(*vp * draw.world));
        set_uniform_mat3(gl, self.mesh_program, "u_normal_matrix", &normal_matrix);
        set_uniform_vec3(gl, self.mesh_program, "u_color", Vec3::from(draw.color.to_rgb_f32()));

        gl.bind_vertex_array(Some(mesh.vao));
        match mesh.ibo {
            Some(ibo) => {
                gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
                gl.draw_elements(glow::TRIANGLES, mesh.count, glow::UNSIGNED_INT, 0);
            }
            None => gl.draw_arrays(glow::TRIANGLES, 0, mesh.count),
        }
        gl.bind_vertex_array(None);
    }

    unsafe fn draw_lines(&self, gl: &glow::Context, lines: &GpuLines, draw: &LineDraw, vp: &Mat4) {
        set_uniform_mat4(gl, self.line_program, "u_mvp", &(*vp * draw.world));
        set_uniform_vec3(gl, self.line_program, "u_color", Vec3::from(draw.color.to_rgb_f32()));
        gl.bind_vertex_array(Some(lines.vao));
        gl.draw_arrays(glow::LINES, 0, lines.vertex_count);
        gl.bind_vertex_array(None);
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        for (_, mesh) in self.meshes.drain() {
            delete_mesh(gl, &mesh);
        }
        for (_, lines) in self.lines.drain() {
            delete_lines(gl, &lines);
        }
        unsafe {
            gl.delete_program(self.mesh_program);
            gl.delete_program(self.line_program);
        }
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, geometry: &Geometry) -> GpuMesh {
    let vertices = geometry.interleaved();
    unsafe {
        let vao = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, cast_slice(&vertices), glow::STATIC_DRAW);

        let stride = 6 * 4; // 6 floats * 4 bytes
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);

        let (ibo, count) = match geometry.indices() {
            Some(indices) => {
                let ibo = gl.create_buffer().unwrap();
                gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
                gl.buffer_data_u8_slice(
                    glow::ELEMENT_ARRAY_BUFFER,
                    cast_slice(indices),
                    glow::STATIC_DRAW,
                );
                (Some(ibo), indices.len() as i32)
            }
            None => (None, geometry.vertex_count() as i32),
        };

        gl.bind_vertex_array(None);

        GpuMesh { vao, vbo, ibo, count }
    }
}

fn upload_lines(gl: &glow::Context, geometry: &LineGeometry) -> GpuLines {
    let vertices = geometry.flattened();
    unsafe {
        let vao = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, cast_slice(&vertices), glow::STATIC_DRAW);

        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 3 * 4, 0);

        gl.bind_vertex_array(None);

        GpuLines {
            vao,
            vbo,
            vertex_count: geometry.positions().len() as i32,
        }
    }
}

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh.vbo);
        if let Some(ibo) = mesh.ibo {
            gl.delete_buffer(ibo);
        }
    }
}

fn delete_lines(gl: &glow::Context, lines: &GpuLines) {
    unsafe {
        gl.delete_vertex_array(lines.vao);
        gl.delete_buffer(lines.vbo);
    }
}

// ── Shader compilation ───────────────────────────────────────

#[cfg(not(target_arch = "wasm32"))]
const GLSL_HEADER: &str = "#version 330 core\n";

#[cfg(target_arch = "wasm32")]
const GLSL_HEADER: &str = "#version 300 es\nprecision mediump float;\n";

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> glow::Program {
    let vert_src = format!("{GLSL_HEADER}{vert_src}");
    let frag_src = format!("{GLSL_HEADER}{frag_src}");
    unsafe {
        let program = gl.create_program().unwrap();

        let vert = gl.create_shader(glow::VERTEX_SHADER).unwrap();
        gl.shader_source(vert, &vert_src);
        gl.compile_shader(vert);
        if !gl.get_shader_compile_status(vert) {
            let log = gl.get_shader_info_log(vert);
            tracing::error!("Vertex shader error: {log}");
        }

        let frag = gl.create_shader(glow::FRAGMENT_SHADER).unwrap();
        gl.shader_source(frag, &frag_src);
        gl.compile_shader(frag);
        if !gl.get_shader_compile_status(frag) {
            let log = gl.get_shader_info_log(frag);
            tracing::error!("Fragment shader error: {log}");
        }

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            tracing::error!("Program link error: {log}");
        }

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        program
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_mat3(gl: &glow::Context, program: glow::Program, name: &str, mat: &Mat3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_3_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_f32(gl: &glow::Context, program: glow::Program, name: &str, v: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_f32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

// ── Shaders (version header prepended per target) ────────────

const MESH_VERT: &str = r#"
uniform mat4 u_mvp;
uniform mat3 u_normal_matrix;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

out vec3 v_normal;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_normal = u_normal_matrix * a_normal;
}
"#;

const MESH_FRAG: &str = r#"
uniform vec3 u_color;
uniform vec3 u_sky;
uniform vec3 u_ground;
uniform float u_hemi_intensity;
uniform vec3 u_hemi_up;
uniform vec3 u_sun;
uniform float u_sun_intensity;
uniform vec3 u_to_sun;

in vec3 v_normal;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    float w = dot(n, u_hemi_up) * 0.5 + 0.5;
    vec3 hemi = mix(u_ground, u_sky, w) * u_hemi_intensity;
    vec3 sun = u_sun * max(dot(n, u_to_sun), 0.0) * u_sun_intensity;
    vec3 lit = u_color * (hemi + sun);
    frag_color = vec4(min(lit, vec3(1.0)), 1.0);
}
"#;

const LINE_VERT: &str = r#"
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
}
"#;

const LINE_FRAG: &str = r#"
uniform vec3 u_color;
out vec4 frag_color;

void main() {
    frag_color = vec4(u_color, 1.0);
}
"#;
