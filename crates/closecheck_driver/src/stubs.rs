//! Embedded standard-library stubs.
//!
//! Just enough of each package's API for declarations like
//! `f, err := os.Open(name)` to type check. Functions have no bodies.

/// (import path, source) for every embedded package.
const STUBS: &[(&str, &str)] = &[
    ("errors", ERRORS),
    ("io", IO),
    ("os", OS),
    ("bufio", BUFIO),
    ("strings", STRINGS),
    ("fmt", FMT),
    ("net", NET),
    ("net/http", NET_HTTP),
    ("database/sql", DATABASE_SQL),
];

pub fn stub_source(path: &str) -> Option<&'static str> {
    STUBS
        .iter()
        .find(|(stub_path, _)| *stub_path == path)
        .map(|(_, source)| *source)
}

pub fn stub_paths() -> impl Iterator<Item = &'static str> {
    STUBS.iter().map(|(path, _)| *path)
}

const ERRORS: &str = r#"package errors

func New(text string) error

func Is(err, target error) bool

func As(err error, target interface{}) bool

func Unwrap(err error) error
"#;

const IO: &str = r#"package io

type Reader interface {
	Read(p []byte) (n int, err error)
}

type Writer interface {
	Write(p []byte) (n int, err error)
}

type Closer interface {
	Close() error
}

type ReadCloser interface {
	Reader
	Closer
}

type WriteCloser interface {
	Writer
	Closer
}

type ReadWriteCloser interface {
	Reader
	Writer
	Closer
}

var EOF error

func ReadAll(r Reader) ([]byte, error)

func Copy(dst Writer, src Reader) (written int64, err error)

func NopCloser(r Reader) ReadCloser
"#;

const OS: &str = r#"package os

type FileMode uint32

type File struct {
	name string
}

const (
	O_RDONLY int = 0
	O_WRONLY int = 1
	O_RDWR   int = 2
	O_APPEND int = 1024
	O_CREATE int = 64
	O_TRUNC  int = 512
)

var (
	Stdin  *File
	Stdout *File
	Stderr *File
	Args   []string
)

func Open(name string) (*File, error)

func Create(name string) (*File, error)

func OpenFile(name string, flag int, perm FileMode) (*File, error)

func ReadFile(name string) ([]byte, error)

func WriteFile(name string, data []byte, perm FileMode) error

func Remove(name string) error

func Getenv(key string) string

func Exit(code int)

func (f *File) Close() error

func (f *File) Name() string

func (f *File) Read(b []byte) (n int, err error)

func (f *File) Write(b []byte) (n int, err error)

func (f *File) WriteString(s string) (n int, err error)

func (f *File) Sync() error
"#;

const BUFIO: &str = r#"package bufio

import "io"

type Reader struct {
	rd io.Reader
}

type Writer struct {
	wr io.Writer
}

type Scanner struct {
	r io.Reader
}

func NewReader(rd io.Reader) *Reader

func NewWriter(w io.Writer) *Writer

func NewScanner(r io.Reader) *Scanner

func (b *Reader) Read(p []byte) (n int, err error)

func (b *Reader) ReadString(delim byte) (string, error)

func (b *Writer) Write(p []byte) (nn int, err error)

func (b *Writer) WriteString(s string) (int, error)

func (b *Writer) Flush() error

func (s *Scanner) Scan() bool

func (s *Scanner) Text() string

func (s *Scanner) Err() error
"#;

const STRINGS: &str = r#"package strings

type Reader struct {
	s string
}

type Builder struct {
	buf []byte
}

func NewReader(s string) *Reader

func (r *Reader) Read(b []byte) (n int, err error)

func (b *Builder) WriteString(s string) (int, error)

func (b *Builder) String() string

func Contains(s, substr string) bool

func HasPrefix(s, prefix string) bool

func Split(s, sep string) []string

func Join(elems []string, sep string) string

func TrimSpace(s string) string
"#;

const FMT: &str = r#"package fmt

import "io"

func Println(a ...interface{}) (n int, err error)

func Printf(format string, a ...interface{}) (n int, err error)

func Sprintf(format string, a ...interface{}) string

func Fprintf(w io.Writer, format string, a ...interface{}) (n int, err error)

func Errorf(format string, a ...interface{}) error
"#;

const NET: &str = r#"package net

type Addr interface {
	Network() string
	String() string
}

type Conn interface {
	Read(b []byte) (n int, err error)
	Write(b []byte) (n int, err error)
	Close() error
	LocalAddr() Addr
	RemoteAddr() Addr
}

type Listener interface {
	Accept() (Conn, error)
	Close() error
	Addr() Addr
}

func Dial(network, address string) (Conn, error)

func Listen(network, address string) (Listener, error)
"#;

const NET_HTTP: &str = r#"package http

import "io"

type Header map[string][]string

type Request struct {
	Method string
	URL    string
	Header Header
	Body   io.ReadCloser
}

type Response struct {
	Status     string
	StatusCode int
	Header     Header
	Body       io.ReadCloser
}

type Client struct {
	Timeout int64
}

var DefaultClient *Client

func Get(url string) (resp *Response, err error)

func Post(url, contentType string, body io.Reader) (resp *Response, err error)

func NewRequest(method, url string, body io.Reader) (*Request, error)

func (c *Client) Do(req *Request) (*Response, error)

func (c *Client) Get(url string) (resp *Response, err error)
"#;

const DATABASE_SQL: &str = r#"package sql

type DB struct {
	driverName string
}

type Tx struct {
	db *DB
}

type Rows struct {
	closed bool
}

type Row struct {
	err error
}

type Stmt struct {
	query string
}

type Result interface {
	LastInsertId() (int64, error)
	RowsAffected() (int64, error)
}

var ErrNoRows error

func Open(driverName, dataSourceName string) (*DB, error)

func (db *DB) Close() error

func (db *DB) Ping() error

func (db *DB) Begin() (*Tx, error)

func (db *DB) Prepare(query string) (*Stmt, error)

func (db *DB) Query(query string, args ...interface{}) (*Rows, error)

func (db *DB) QueryRow(query string, args ...interface{}) *Row

func (db *DB) Exec(query string, args ...interface{}) (Result, error)

func (tx *Tx) Commit() error

func (tx *Tx) Rollback() error

func (rs *Rows) Next() bool

func (rs *Rows) Scan(dest ...interface{}) error

func (rs *Rows) Err() error

func (rs *Rows) Close() error

func (r *Row) Scan(dest ...interface{}) error

func (s *Stmt) Close() error

func (s *Stmt) Exec(args ...interface{}) (Result, error)
"#;
